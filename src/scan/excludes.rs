//! Default excludes applied while walking directories

/// Editor backups and version control metadata that never take part in snapshots
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/%*%",
    "**/.#*",
    "**/._*",
    "**/#*#",
    "**/*~",
    "**/.DS_Store",
    "**/CVS",
    "**/CVS/**",
    "**/.cvsignore",
    "**/SCCS",
    "**/SCCS/**",
    "**/.bzr",
    "**/.bzr/**",
    "**/.bzrignore",
    "**/vssver.scc",
    "**/.hg",
    "**/.hg/**",
    "**/.hgtags",
    "**/.hgignore",
    "**/.hgsubstate",
    "**/.hgsub",
    "**/.svn",
    "**/.svn/**",
    "**/.git",
    "**/.git/**",
    "**/.gitignore",
    "**/.gitmodules",
    "**/.gitattributes",
];

pub fn default_exclude_patterns() -> Vec<String> {
    DEFAULT_EXCLUDES.iter().map(|pattern| pattern.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NamePattern {
    start: String,
    end: String,
}

impl NamePattern {
    fn matches(&self, name: &str) -> bool {
        name.len() >= self.start.len() + self.end.len()
            && name.starts_with(&self.start)
            && name.ends_with(&self.end)
    }
}

/// Name based exclude rules.
///
/// A leading `**/` is ignored. Patterns ending in `/**` exclude directories with
/// that name. Other patterns exclude files by exact name, or by prefix and suffix
/// around their first `*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultExcludes {
    file_names: Vec<String>,
    dir_names: Vec<String>,
    file_patterns: Vec<NamePattern>,
}

impl DefaultExcludes {
    pub fn new<S: AsRef<str>>(patterns: impl IntoIterator<Item = S>) -> Self {
        let mut excludes = DefaultExcludes::default();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let pattern = pattern.strip_prefix("**/").unwrap_or(pattern);
            if let Some(dir_name) = pattern.strip_suffix("/**") {
                excludes.dir_names.push(dir_name.to_string());
            } else if let Some(star) = pattern.find('*') {
                excludes.file_patterns.push(NamePattern {
                    start: pattern[..star].to_string(),
                    end: pattern[star + 1..].to_string(),
                });
            } else {
                excludes.file_names.push(pattern.to_string());
            }
        }
        excludes
    }

    pub fn exclude_dir(&self, name: &str) -> bool {
        self.dir_names.iter().any(|dir_name| dir_name == name)
    }

    pub fn exclude_file(&self, name: &str) -> bool {
        self.file_names.iter().any(|file_name| file_name == name)
            || self.file_patterns.iter().any(|pattern| pattern.matches(name))
    }

    pub fn excludes(&self, name: &str, is_directory: bool) -> bool {
        if is_directory {
            self.exclude_dir(name)
        } else {
            self.exclude_file(name)
        }
    }
}

impl Default for DefaultExcludesList {
    fn default() -> Self {
        DefaultExcludesList(default_exclude_patterns())
    }
}

/// Exclude patterns as they appear in configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DefaultExcludesList(pub Vec<String>);

impl DefaultExcludesList {
    pub fn compile(&self) -> DefaultExcludes {
        DefaultExcludes::new(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> DefaultExcludes {
        DefaultExcludes::new(DEFAULT_EXCLUDES)
    }

    #[test]
    fn test_directory_excludes() {
        let excludes = defaults();
        assert!(excludes.exclude_dir(".git"));
        assert!(excludes.exclude_dir("CVS"));
        assert!(!excludes.exclude_dir("src"));
        assert!(!excludes.exclude_dir(".gitignore"));
    }

    #[test]
    fn test_file_excludes() {
        let excludes = defaults();
        assert!(excludes.exclude_file(".git"));
        assert!(excludes.exclude_file(".DS_Store"));
        assert!(excludes.exclude_file("Main.java~"));
        assert!(excludes.exclude_file("#notes#"));
        assert!(excludes.exclude_file("%temp%"));
        assert!(excludes.exclude_file("._resource"));
        assert!(!excludes.exclude_file("#"));
        assert!(!excludes.exclude_file("Main.java"));
        assert!(!excludes.exclude_file("%"));
    }

    #[test]
    fn test_custom_patterns() {
        let excludes = DefaultExcludes::new(["build/**", "*.tmp", "**/secret"]);
        assert!(excludes.excludes("build", true));
        assert!(!excludes.excludes("build", false));
        assert!(excludes.excludes("data.tmp", false));
        assert!(excludes.excludes("secret", false));
        assert!(!excludes.excludes("data.txt", false));
    }

    #[test]
    fn test_config_list_defaults() {
        let list = DefaultExcludesList::default();
        assert_eq!(list.0.len(), DEFAULT_EXCLUDES.len());
        assert!(list.compile().exclude_dir(".svn"));
    }
}
