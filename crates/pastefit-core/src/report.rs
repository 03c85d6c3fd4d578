use std::fmt;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Render a byte count as megabytes with two decimals
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}MB", bytes as f64 / BYTES_PER_MB)
}

/// Size change of a single pasted image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeReduction {
    pub original_size: u64,
    pub new_size: u64,
}

impl SizeReduction {
    /// Only a strict shrink is worth reporting
    pub fn between(original_size: u64, new_size: u64) -> Option<Self> {
        (new_size < original_size).then_some(Self {
            original_size,
            new_size,
        })
    }

    /// Reduction as a rounded integer percentage
    pub fn percent(&self) -> u32 {
        ((1.0 - self.new_size as f64 / self.original_size as f64) * 100.0).round() as u32
    }
}

impl fmt::Display for SizeReduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Image resized: {} → {} ({}% smaller)",
            format_megabytes(self.original_size),
            format_megabytes(self.new_size),
            self.percent()
        )
    }
}

/// Aggregate result of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub resized: usize,
    pub skipped: usize,
    pub errors: usize,
    pub bytes_saved: u64,
    /// Set when the run stopped before every file was visited
    pub cancelled: bool,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.resized + self.skipped + self.errors
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch resize complete!")?;
        writeln!(f, "Resized: {}", self.resized)?;
        writeln!(f, "Skipped: {}", self.skipped)?;
        writeln!(f, "Errors: {}", self.errors)?;
        write!(f, "Space saved: {}", format_megabytes(self.bytes_saved))?;
        if self.cancelled {
            write!(f, "\nCancelled before all files were processed")?;
        }
        Ok(())
    }
}
