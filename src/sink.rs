use crate::error::AppError;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Destination for result lines. Lines are appended, never rewritten.
pub trait TransferSink {
    fn write_line(&mut self, line: &str) -> Result<(), AppError>;
}

/// Appends result lines to a file and echoes them to stdout.
pub struct FileSink {
    file: File,
    echo: bool,
}

impl FileSink {
    /// Open `path` for appending, creating it when missing.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        info!(output = %path.display(), "Appending results to output file");

        Ok(Self {
            file,
            echo: true,
        })
    }

    /// Disable the stdout echo.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }
}

impl TransferSink for FileSink {
    fn write_line(&mut self, line: &str) -> Result<(), AppError> {
        if self.echo {
            println!("{}", line);
        }
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }
}

impl TransferSink for Vec<String> {
    fn write_line(&mut self, line: &str) -> Result<(), AppError> {
        self.push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_without_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered_transactions.txt");
        std::fs::write(&path, "earlier run\n").unwrap();

        let mut sink = FileSink::open(&path).unwrap().quiet();
        sink.write_line("[A] => [B] | amt:1.000000000 splOrNative:1 tx:sig")
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "earlier run\n[A] => [B] | amt:1.000000000 splOrNative:1 tx:sig\n"
        );
    }
}
