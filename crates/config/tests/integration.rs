//! Integration tests for config

#[cfg(test)]
mod tests {
    use lastore_config::*;
    use lastore_types::JobId;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
default_region = "cn"

[jobs]
auto_start = false
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.default_region, "cn");
        assert!(!config.jobs.auto_start);
    }

    #[tokio::test]
    async fn test_missing_sections_use_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[general]").unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.default_region, "");
        assert!(config.jobs.auto_start);
    }

    #[tokio::test]
    async fn test_invalid_toml_is_parse_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[general\ndefault_region = ").unwrap();

        let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
        assert!(matches!(
            err,
            lastore_errors::Error::Config(lastore_errors::ConfigError::ParseError { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.general.default_region = "us".to_string();
        config.save_to_file(&path).await.unwrap();

        let loaded = Config::load_or_default(Some(&path)).await.unwrap();
        assert_eq!(loaded.general.default_region, "us");
        assert!(loaded.jobs.auto_start);
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::set_var("LASTORE_REGION", "eu");
        std::env::set_var("LASTORE_AUTO_START", "no");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.general.default_region, "eu");
        assert!(!config.jobs.auto_start);

        std::env::remove_var("LASTORE_REGION");
        std::env::remove_var("LASTORE_AUTO_START");
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("LASTORE_REGION");
        std::env::set_var("LASTORE_AUTO_START", "maybe");

        let mut config = Config::default();
        assert!(config.merge_env().is_err());

        std::env::remove_var("LASTORE_AUTO_START");
    }

    #[test]
    fn test_region_fallback() {
        let mut config = Config::default();
        config.general.default_region = "cn".to_string();
        assert_eq!(config.region_or_default(None), "cn");
        assert_eq!(config.region_or_default(Some("")), "");
    }

    #[test]
    fn test_job_object_path() {
        assert_eq!(job_object_path(JobId::new(12)), "/org/deepin/lastore/Job12");
    }
}
