use crate::reports::{RenderOptions, DEFAULT_LABEL_WIDTH, DEFAULT_TOP_N};
use std::path::PathBuf;

pub const DEFAULT_SOURCE: &str = "Orders Final Limpio.xlsx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub source_path: PathBuf,
    pub top_n: usize,
    pub label_width: usize,
    /// Rows shown in console table previews.
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE),
            top_n: DEFAULT_TOP_N,
            label_width: DEFAULT_LABEL_WIDTH,
            preview_rows: 5,
        }
    }
}

impl DashboardConfig {
    /// Defaults, with the first positional argument (if any) as the source
    /// file. `args` excludes the program name.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self::default();
        if let Some(path) = args.into_iter().map(Into::into).find(|a| !a.trim().is_empty()) {
            config.source_path = PathBuf::from(path);
        }
        config
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            top_n: self.top_n,
            label_width: self.label_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_layout() {
        let config = DashboardConfig::default();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.source_path, PathBuf::from(DEFAULT_SOURCE));
        assert_eq!(config.render_options(), RenderOptions::default());
    }

    #[test]
    fn first_argument_overrides_source() {
        let config = DashboardConfig::from_args(["data/orders.csv", "ignored"]);
        assert_eq!(config.source_path, PathBuf::from("data/orders.csv"));
        let config = DashboardConfig::from_args(Vec::<String>::new());
        assert_eq!(config.source_path, PathBuf::from(DEFAULT_SOURCE));
    }
}
