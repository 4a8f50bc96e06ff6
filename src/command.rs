use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::language::{ArtifactKind, LanguageSpec};

/// A fully resolved command, ready for the process layer.
///
/// Single-step languages become a plain argument vector. Build-then-run
/// languages keep both stages separate until execution time, when one
/// platform-specific translation point joins them with a conditional
/// "and-then" so a failed build never reaches the run stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecCommand {
    Argv(Vec<String>),
    BuildThenRun { build: Vec<String>, run: Vec<String> },
}

impl ExecCommand {
    /// Renders the command into the argument vector actually handed to the
    /// OS. This is the only place where shell interpretation and platform
    /// quoting rules apply.
    pub fn into_argv(self) -> Vec<String> {
        match self {
            ExecCommand::Argv(args) => args,
            ExecCommand::BuildThenRun { build, run } => {
                let line = format!("{} && {}", shell_join(&build), shell_join(&run));
                if cfg!(windows) {
                    vec!["cmd".to_string(), "/C".to_string(), line]
                } else {
                    vec!["sh".to_string(), "-c".to_string(), line]
                }
            }
        }
    }
}

/// Builds the executable command for a language and a materialized source
/// path by applying template substitutions.
pub fn synthesize(spec: &LanguageSpec, source_path: &Path) -> ExecCommand {
    let source = source_path.to_string_lossy().into_owned();
    let artifact = artifact_path(spec, source_path)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let class_dir = source_path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string());
    let class_name = source_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut mapping = HashMap::<&str, &str>::new();
    mapping.insert("%SOURCE%", &source);
    mapping.insert("%ARTIFACT%", &artifact);
    mapping.insert("%CLASSDIR%", &class_dir);
    mapping.insert("%CLASSNAME%", &class_name);

    let run = apply_template(spec.run, &mapping);
    if spec.is_compiled() {
        ExecCommand::BuildThenRun {
            build: apply_template(spec.build, &mapping),
            run,
        }
    } else {
        ExecCommand::Argv(run)
    }
}

/// Derives the artifact path deterministically from the source path: same
/// base name, suffix chosen by the language's artifact kind.
fn artifact_path(spec: &LanguageSpec, source_path: &Path) -> Option<PathBuf> {
    match spec.artifact {
        ArtifactKind::None => None,
        ArtifactKind::NativeExecutable => {
            let ext = if cfg!(windows) { "exe" } else { "out" };
            Some(source_path.with_extension(ext))
        }
        ArtifactKind::Jar => Some(source_path.with_extension("jar")),
    }
}

/// Applies placeholder substitutions to a command template.
fn apply_template(template: &[&str], mapping: &HashMap<&str, &str>) -> Vec<String> {
    template
        .iter()
        .map(|s| {
            let mut t = s.to_string();
            for (k, v) in mapping.iter() {
                t = t.replace(k, v);
            }
            t
        })
        .collect()
}

fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|a| quote(a))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quotes one argument for the platform shell. Temp paths can contain
/// spaces (notably on Windows), so nothing is passed through unquoted
/// unless it is plainly safe.
fn quote(arg: &str) -> String {
    if cfg!(windows) {
        format!("\"{}\"", arg.replace('"', "\"\""))
    } else if !arg.is_empty()
        && arg
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"-_./=+".contains(&b))
    {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::lookup;

    #[test]
    fn interpreted_language_yields_plain_argv() {
        let spec = lookup("python").unwrap();
        let cmd = synthesize(spec, Path::new("/tmp/work/snippet-ab12.py"));
        assert_eq!(
            cmd,
            ExecCommand::Argv(vec![
                "python3".to_string(),
                "/tmp/work/snippet-ab12.py".to_string(),
            ])
        );
    }

    #[test]
    fn compiled_language_yields_build_then_run() {
        let spec = lookup("c").unwrap();
        let cmd = synthesize(spec, Path::new("/tmp/work/snippet-ab12.c"));
        let ExecCommand::BuildThenRun { build, run } = cmd else {
            panic!("expected build-then-run command");
        };
        assert_eq!(build[0], "gcc");
        assert!(build.contains(&"/tmp/work/snippet-ab12.out".to_string()));
        assert_eq!(run, vec!["/tmp/work/snippet-ab12.out".to_string()]);
    }

    #[test]
    fn build_failure_short_circuits_via_and_then() {
        let spec = lookup("cpp").unwrap();
        let argv = synthesize(spec, Path::new("/tmp/work/x.cpp")).into_argv();
        assert_eq!(&argv[..2], &["sh".to_string(), "-c".to_string()]);
        assert!(argv[2].contains(" && "));
    }

    #[test]
    fn classpath_language_uses_dir_and_bare_stem() {
        let spec = lookup("java").unwrap();
        let cmd = synthesize(spec, Path::new("/tmp/work/snippet-ab12.java"));
        let ExecCommand::BuildThenRun { run, .. } = cmd else {
            panic!("expected build-then-run command");
        };
        assert_eq!(
            run,
            vec![
                "java".to_string(),
                "-cp".to_string(),
                "/tmp/work".to_string(),
                "snippet-ab12".to_string(),
            ]
        );
    }

    #[test]
    fn jar_language_derives_jar_artifact() {
        let spec = lookup("kotlin").unwrap();
        let ExecCommand::BuildThenRun { build, run } =
            synthesize(spec, Path::new("/tmp/work/s.kt"))
        else {
            panic!("expected build-then-run command");
        };
        assert!(build.contains(&"/tmp/work/s.jar".to_string()));
        assert_eq!(run.last().unwrap(), "/tmp/work/s.jar");
    }

    #[cfg(unix)]
    #[test]
    fn shell_rendering_quotes_awkward_paths() {
        let spec = lookup("c").unwrap();
        let argv = synthesize(spec, Path::new("/tmp/with space/x.c")).into_argv();
        assert!(argv[2].contains("'/tmp/with space/x.c'"));
        assert!(argv[2].contains("'/tmp/with space/x.out'"));
    }
}
