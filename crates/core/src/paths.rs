use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Paths {
    pub base: PathBuf,
}

impl Paths {
    pub fn new() -> Self {
        let base = dirs::home_dir()
            .map(|h| h.join(".tabtree"))
            .unwrap_or_else(|| PathBuf::from(".tabtree"));
        Self { base }
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.json")
    }

    /// Backing file of the session storage area (opener graph, marks).
    pub fn session_file(&self) -> PathBuf {
        self.base.join("session.json")
    }

    /// Simulated browser window driven by the CLI.
    pub fn window_file(&self) -> PathBuf {
        self.base.join("window.json")
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.base)?;
        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}
