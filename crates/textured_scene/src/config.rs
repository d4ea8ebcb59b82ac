use std::path::Path;
use std::path::PathBuf;

/// Startup settings for the demo. Everything has a fixed default; the
/// process arguments can only switch the adapter to WARP.
#[derive(Clone, Debug, PartialEq)]
pub struct DemoConfig {
    pub client_width: u32,
    pub client_height: u32,
    pub title: String,
    pub window_class: String,
    pub resource_directory: PathBuf,
    pub model_file: String,
    pub clear_color: [f32; 4],
    pub sync_interval: u32,
    pub use_warp_device: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            client_width: 1280,
            client_height: 720,
            title: "CG2".into(),
            window_class: "CG2WindowClass".into(),
            resource_directory: PathBuf::from("resources"),
            model_file: "plane.obj".into(),
            clear_color: [0.1, 0.25, 0.5, 1.0],
            sync_interval: 1,
            use_warp_device: false,
        }
    }
}

impl DemoConfig {
    pub fn from_env() -> Self {
        Self::from_args(std::env::args())
    }

    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            if arg.eq_ignore_ascii_case("-warp") || arg.eq_ignore_ascii_case("/warp") {
                config.use_warp_device = true;
            }
        }
        config
    }

    pub fn window_title(&self) -> String {
        match self.use_warp_device {
            true => format!("{} (WARP)", self.title),
            false => self.title.clone(),
        }
    }

    /// The resource directory as given when it exists relative to the
    /// working directory, otherwise the copy shipped next to this crate's
    /// manifest.
    pub fn resolve_resource_directory(&self) -> PathBuf {
        if self.resource_directory.is_absolute() || self.resource_directory.is_dir() {
            return self.resource_directory.clone();
        }
        let bundled = Path::new(env!("CARGO_MANIFEST_DIR")).join(&self.resource_directory);
        if bundled.is_dir() {
            bundled
        } else {
            self.resource_directory.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_window() {
        let config = DemoConfig::from_args(["textured_scene.exe"]);
        assert_eq!((config.client_width, config.client_height), (1280, 720));
        assert!(!config.use_warp_device);
        assert_eq!(config.window_title(), "CG2");
    }

    #[test]
    fn warp_flag_is_case_insensitive_and_others_are_ignored() {
        let config = DemoConfig::from_args(["textured_scene.exe", "--verbose", "/WARP"]);
        assert!(config.use_warp_device);
        assert_eq!(config.window_title(), "CG2 (WARP)");
    }

    #[test]
    fn bundled_resources_are_found_from_any_working_directory() {
        let config = DemoConfig::default();
        let directory = config.resolve_resource_directory();
        assert!(directory.join("plane.obj").is_file(), "{}", directory.display());
    }

    #[test]
    fn absolute_resource_directory_is_kept() {
        let temp = tempfile::tempdir().unwrap();
        let config = DemoConfig {
            resource_directory: temp.path().to_path_buf(),
            ..Default::default()
        };
        assert_eq!(config.resolve_resource_directory(), temp.path());
    }
}
