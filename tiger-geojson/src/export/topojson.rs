//! Conversion GeoJSON -> TopoJSON via le CLI `topojson`

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// Commande de conversion externe
#[derive(Debug, Clone)]
pub struct TopojsonCommand {
    program: String,
}

impl TopojsonCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments: `-o <sortie> <entrée> -p` (quantification, topologie préservée)
    pub fn args(input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            OsString::from("-o"),
            output.as_os_str().to_owned(),
            input.as_os_str().to_owned(),
            OsString::from("-p"),
        ]
    }

    /// Lance la conversion; échec au lancement ou code de sortie non nul = erreur
    pub fn run(&self, input: &Path, output: &Path) -> Result<(), String> {
        let result = Command::new(&self.program)
            .args(Self::args(input, output))
            .output()
            .map_err(|e| format!("failed to run {}: {}", self.program, e))?;

        if result.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&result.stderr);
        Err(format!(
            "{} exited with {}: {}",
            self.program,
            result.status,
            stderr.trim()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_order() {
        let args = TopojsonCommand::args(
            Path::new("geojson/state/AK.geojson"),
            Path::new("topojson/state/AK.topojson"),
        );
        assert_eq!(
            args,
            vec![
                OsString::from("-o"),
                OsString::from("topojson/state/AK.topojson"),
                OsString::from("geojson/state/AK.geojson"),
                OsString::from("-p"),
            ]
        );
    }

    #[test]
    fn test_missing_program() {
        let cmd = TopojsonCommand::new("tiger-geojson-no-such-topojson-binary");
        let err = cmd
            .run(Path::new("in.geojson"), Path::new("out.topojson"))
            .unwrap_err();
        assert!(err.contains("failed to run"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status() {
        let ok = TopojsonCommand::new("true");
        assert!(ok
            .run(Path::new("in.geojson"), Path::new("out.topojson"))
            .is_ok());

        let failing = TopojsonCommand::new("false");
        let err = failing
            .run(Path::new("in.geojson"), Path::new("out.topojson"))
            .unwrap_err();
        assert!(err.contains("exited with"));
    }
}
