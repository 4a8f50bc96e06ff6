/// How a build artifact's file name is derived from the source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// No on-disk artifact (interpreted languages, classpath languages).
    None,
    /// Native executable next to the source: `.exe` on Windows, `.out` elsewhere.
    NativeExecutable,
    /// Self-contained jar next to the source.
    Jar,
}

/// Static description of one supported language.
///
/// `build` and `run` are command templates; `%SOURCE%`, `%ARTIFACT%`,
/// `%CLASSDIR%` and `%CLASSNAME%` are substituted at synthesis time.
/// An empty `build` means the language runs in a single invocation.
#[derive(Debug)]
pub struct LanguageSpec {
    pub id: &'static str,
    pub extension: &'static str,
    pub build: &'static [&'static str],
    pub run: &'static [&'static str],
    pub artifact: ArtifactKind,
}

impl LanguageSpec {
    pub fn is_compiled(&self) -> bool {
        !self.build.is_empty()
    }
}

/// The language table, built once and never mutated.
///
/// Ids are lowercase and unique; callers lowercase incoming tags before
/// lookup.
pub const LANGUAGES: &[LanguageSpec] = &[
    LanguageSpec {
        id: "python",
        extension: "py",
        build: &[],
        run: &["python3", "%SOURCE%"],
        artifact: ArtifactKind::None,
    },
    LanguageSpec {
        id: "javascript",
        extension: "js",
        build: &[],
        run: &["node", "%SOURCE%"],
        artifact: ArtifactKind::None,
    },
    LanguageSpec {
        id: "ruby",
        extension: "rb",
        build: &[],
        run: &["ruby", "%SOURCE%"],
        artifact: ArtifactKind::None,
    },
    LanguageSpec {
        id: "r",
        extension: "r",
        build: &[],
        run: &["Rscript", "%SOURCE%"],
        artifact: ArtifactKind::None,
    },
    // `go run` compiles internally but is still a single invocation.
    LanguageSpec {
        id: "go",
        extension: "go",
        build: &[],
        run: &["go", "run", "%SOURCE%"],
        artifact: ArtifactKind::None,
    },
    LanguageSpec {
        id: "c",
        extension: "c",
        build: &["gcc", "%SOURCE%", "-o", "%ARTIFACT%"],
        run: &["%ARTIFACT%"],
        artifact: ArtifactKind::NativeExecutable,
    },
    LanguageSpec {
        id: "cpp",
        extension: "cpp",
        build: &["g++", "%SOURCE%", "-o", "%ARTIFACT%"],
        run: &["%ARTIFACT%"],
        artifact: ArtifactKind::NativeExecutable,
    },
    // The classpath root is the directory holding the source; the entry
    // point is the bare file stem. A public class with a different name is
    // an ordinary javac error, not our problem to prevent.
    LanguageSpec {
        id: "java",
        extension: "java",
        build: &["javac", "%SOURCE%"],
        run: &["java", "-cp", "%CLASSDIR%", "%CLASSNAME%"],
        artifact: ArtifactKind::None,
    },
    LanguageSpec {
        id: "kotlin",
        extension: "kt",
        build: &["kotlinc", "%SOURCE%", "-include-runtime", "-d", "%ARTIFACT%"],
        run: &["java", "-jar", "%ARTIFACT%"],
        artifact: ArtifactKind::Jar,
    },
];

/// Looks up a language by its lowercase canonical id.
pub fn lookup(id: &str) -> Option<&'static LanguageSpec> {
    LANGUAGES.iter().find(|spec| spec.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_lowercase_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for spec in LANGUAGES {
            assert_eq!(spec.id, spec.id.to_lowercase());
            assert!(seen.insert(spec.id), "duplicate language id {}", spec.id);
        }
    }

    #[test]
    fn lookup_finds_known_languages() {
        assert_eq!(lookup("python").unwrap().extension, "py");
        assert_eq!(lookup("cpp").unwrap().extension, "cpp");
        assert_eq!(lookup("java").unwrap().extension, "java");
    }

    #[test]
    fn lookup_is_case_sensitive_on_canonical_form() {
        assert!(lookup("Python").is_none());
        assert!(lookup("brainfuck").is_none());
    }

    #[test]
    fn registry_covers_all_execution_shapes() {
        // One single-invocation interpreter, one native build-then-run,
        // one classpath language.
        assert!(!lookup("python").unwrap().is_compiled());
        let c = lookup("c").unwrap();
        assert!(c.is_compiled());
        assert_eq!(c.artifact, ArtifactKind::NativeExecutable);
        let java = lookup("java").unwrap();
        assert!(java.is_compiled());
        assert_eq!(java.artifact, ArtifactKind::None);
    }
}
