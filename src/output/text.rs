//! Plain text report.
//!
//! ```text
//! Comparing files with the same size...
//! Duplicates Found:
//! The following files are identical. The name could differ, but the content is identical
//! ___________________
//! 		/photos/a.jpg
//! 		/backup/a-copy.jpg
//! ___________________
//! Time Taken: 0.42 seconds
//! file size specified was: 10 MB
//! ```

use std::io::{self, Write};

use crate::duplicates::{DuplicateSet, ScanSummary};

const SEPARATOR: &str = "___________________";

/// Printed once the size phase is over, before any result.
const COMPARING_NOTICE: &str = "Comparing files with the same size...";

/// Text rendering of a scan result.
#[derive(Debug)]
pub struct TextReport<'a> {
    set: &'a DuplicateSet,
    summary: &'a ScanSummary,
    size_mb: i64,
}

impl<'a> TextReport<'a> {
    /// `size_mb` is the threshold as given by the user; it is echoed back
    /// when its magnitude is above 1.
    #[must_use]
    pub fn new(set: &'a DuplicateSet, summary: &'a ScanSummary, size_mb: i64) -> Self {
        Self {
            set,
            summary,
            size_mb,
        }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{COMPARING_NOTICE}")?;

        if self.set.is_empty() {
            writeln!(writer, "No duplicate files found.")?;
        } else {
            writeln!(writer, "Duplicates Found:")?;
            writeln!(
                writer,
                "The following files are identical. The name could differ, but the content is identical"
            )?;
            writeln!(writer, "{SEPARATOR}")?;
            for group in self.set.sorted_by_size() {
                for path in &group.paths {
                    writeln!(writer, "\t\t{}", path.display())?;
                }
                writeln!(writer, "{SEPARATOR}")?;
            }
        }

        writeln!(
            writer,
            "Time Taken: {:.2} seconds",
            self.summary.scan_duration.as_secs_f64()
        )?;

        let size = self.size_mb.unsigned_abs();
        if size > 1 {
            writeln!(writer, "file size specified was: {size} MB")?;
        }
        Ok(())
    }

    /// Render the report to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}
