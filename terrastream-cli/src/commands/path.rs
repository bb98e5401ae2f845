//! Path command - show where a resource lives in the disk cache.

use terrastream::cache::is_network_name;
use terrastream::config::ConfigFile;

use crate::error::CliError;

/// Run the path command.
pub fn run(names: &[String]) -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();
    for name in names {
        println!("{}", describe(&config, name));
    }
    Ok(())
}

fn describe(config: &ConfigFile, name: &str) -> String {
    if is_network_name(name) {
        config
            .cache_config()
            .disk_path(name)
            .display()
            .to_string()
    } else {
        format!("{} (local, not cached)", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_network_name_under_cache_directory() {
        let mut config = ConfigFile::default();
        config.cache.directory = PathBuf::from("/data");
        assert_eq!(
            describe(&config, "https://h.example/a/b.mesh"),
            "/data/cache/h.example/a/b.mesh"
        );
    }

    #[test]
    fn test_local_name_flagged() {
        let config = ConfigFile::default();
        assert!(describe(&config, "data/helper.jpg").ends_with("(local, not cached)"));
    }
}
