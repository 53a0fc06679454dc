use std::collections::BTreeSet;

/// Decides from an entry name alone whether it holds text.
pub trait TextClassifier: Send + Sync {
    fn is_text_file(&self, name: &str) -> bool;

    /// Lower-case extensions (without the dot) this classifier accepts.
    fn supported_extensions(&self) -> BTreeSet<String>;
}

const DEFAULT_EXTENSIONS: &[&str] = &[
    // source code
    "py", "js", "jsx", "mjs", "cjs", "ts", "tsx", "java", "c", "cc", "cpp", "cxx", "h", "hh",
    "hpp", "cs", "go", "rb", "php", "swift", "kt", "kts", "scala", "rs", "m", "mm", "sh", "bash",
    "zsh", "ps1", "lua", "pl", "r", "dart", "ex", "exs", "erl", "hs", "clj", "vue", "svelte",
    // web and data formats
    "html", "htm", "css", "scss", "sass", "less", "json", "xml", "yaml", "yml", "svg",
    // configuration
    "toml", "ini", "cfg", "conf", "properties", "lock", "pom", "gradle", "sbt", "cmake",
    "makefile", "dockerfile", "env", "pro", "qrc", "ui",
    // documentation
    "md", "markdown", "txt", "rst", "rdoc", "tex", "adoc",
    // tabular and logs
    "csv", "tsv", "sql", "log",
];

/// Names without a usable extension that are still text.
///
/// Dotfiles such as `.gitignore` have no extension in the path sense, so they
/// are matched by full name here.
const KNOWN_FILENAMES: &[&str] = &[
    "makefile",
    "gnumakefile",
    "dockerfile",
    "containerfile",
    "vagrantfile",
    "gemfile",
    "rakefile",
    "procfile",
    "jenkinsfile",
    "license",
    "licence",
    "readme",
    "authors",
    "contributors",
    "changelog",
    "notice",
    "codeowners",
    ".gitignore",
    ".gitattributes",
    ".gitconfig",
    ".gitmodules",
    ".dockerignore",
    ".editorconfig",
    ".eslintrc",
    ".babelrc",
    ".prettierrc",
    ".npmrc",
    ".nvmrc",
    ".env",
    ".htaccess",
    ".clang-format",
    ".clang-tidy",
    ".flake8",
    ".pylintrc",
    ".coveragerc",
    ".bandit",
];

/// Extension allow-list classifier.
///
/// Matching is case-insensitive on the last path component. Names with an
/// extension are looked up in the extension set; names without one (and
/// dotfiles) are looked up in a fixed list of well-known filenames.
#[derive(Debug, Clone)]
pub struct ExtensionClassifier {
    extensions: BTreeSet<String>,
}

impl ExtensionClassifier {
    /// Built-in extensions unioned with `extra`.
    ///
    /// Extra extensions may be given with or without the leading dot.
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extensions: BTreeSet<String> =
            DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect();
        extensions.extend(extra.into_iter().filter_map(|ext| normalize_extension(ext.as_ref())));
        Self { extensions }
    }
}

impl Default for ExtensionClassifier {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

impl TextClassifier for ExtensionClassifier {
    fn is_text_file(&self, name: &str) -> bool {
        if crate::zip::ArchiveEntry::is_directory_name(name) {
            return false;
        }

        let base = base_name(name).to_ascii_lowercase();
        match extension(&base) {
            Some(ext) => self.extensions.contains(ext) || is_known_filename(&base),
            None => is_known_filename(&base),
        }
    }

    fn supported_extensions(&self) -> BTreeSet<String> {
        self.extensions.clone()
    }
}

fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
    (!ext.is_empty()).then_some(ext)
}

fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Text after the last dot, unless the dot starts the name (`.gitignore`).
fn extension(base: &str) -> Option<&str> {
    match base.rfind('.') {
        Some(0) | None => None,
        Some(idx) if idx + 1 == base.len() => None,
        Some(idx) => Some(&base[idx + 1..]),
    }
}

fn is_known_filename(base: &str) -> bool {
    KNOWN_FILENAMES.contains(&base) || base.starts_with(".env.")
}
