use citycanopy::cli::{run, Cli};
use citycanopy::{Config, EditorSession};
use clap::Parser;

use super::SCENE;

#[tokio::test]
async fn test_plant_command_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scene.geojson");
    let output = dir.path().join("planted.geojson");
    std::fs::write(&input, SCENE).unwrap();

    let cli = Cli::try_parse_from([
        "citycanopy",
        "plant",
        input.to_str().unwrap(),
        "--polygon",
        "0.01,0.01;0.0105,0.01;0.0105,0.0105;0.01,0.0105",
        "--count",
        "15",
        "--seed",
        "3",
        "-o",
        output.to_str().unwrap(),
    ])
    .unwrap();
    run(cli).await.unwrap();

    let mut session = EditorSession::headless(Config::default());
    session.load_file(&output).unwrap();
    assert_eq!(session.tree_count(), 16);
    // Input untouched
    let original = std::fs::read_to_string(&input).unwrap();
    assert_eq!(original, SCENE);
}

#[tokio::test]
async fn test_export_binary_command() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scene.geojson");
    let output = dir.path().join("trees.stl");
    std::fs::write(&input, SCENE).unwrap();

    let cli = Cli::try_parse_from([
        "citycanopy",
        "export-stl",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "--binary",
    ])
    .unwrap();
    run(cli).await.unwrap();

    // 80-byte header + count + 24 triangles of 50 bytes
    let len = std::fs::metadata(&output).unwrap().len();
    assert_eq!(len, 84 + 24 * 50);
}

#[tokio::test]
async fn test_config_flag_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scene.geojson");
    let config_path = dir.path().join("config.toml");
    std::fs::write(&input, SCENE).unwrap();
    std::fs::write(&config_path, "[energy]\ncolumn = \"\"\n").unwrap();

    let cli = Cli::try_parse_from([
        "citycanopy",
        "--config",
        config_path.to_str().unwrap(),
        "info",
        input.to_str().unwrap(),
    ])
    .unwrap();
    assert!(run(cli).await.is_err());
}
