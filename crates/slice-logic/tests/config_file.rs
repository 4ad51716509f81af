//! Loading logic settings from YAML files.

use slice_logic::{LogicError, SliceLogic, SliceLogicConfig};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_load_partial_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slice.yaml");
    fs::write(&path, "layout: Coronal\nforeground_opacity: 0.5\nslice_model:\n  visible: true\n").unwrap();

    let config = SliceLogicConfig::load(&path).unwrap();
    assert_eq!(config.layout, "Coronal");
    assert_eq!(config.foreground_opacity, 0.5);
    assert!(config.slice_model.visible);
    assert_eq!(config.dimensions, SliceLogicConfig::default().dimensions);

    let logic = SliceLogic::new(config).unwrap();
    assert_eq!(logic.layout_name(), "Coronal");
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let err = SliceLogicConfig::load(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, LogicError::ConfigNotFound { .. }));
}

#[test]
fn test_out_of_range_file_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "dimensions: [0, 256, 1]\n").unwrap();
    assert!(SliceLogicConfig::load(&path).is_err());
}

#[test]
fn test_saved_config_reloads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saved.yaml");
    let config = SliceLogicConfig {
        glyph_spacing: 4,
        ..SliceLogicConfig::for_layout("Sagittal")
    };
    fs::write(&path, config.to_yaml_string().unwrap()).unwrap();
    assert_eq!(SliceLogicConfig::load(&path).unwrap(), config);
}
