use crate::prelude::*;

#[doc = r#"
   Information carried by the `MThd` chunk of a MIDI file
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    format: FormatType,
    track_count: u16,
    division: TicksPerQuarterNote,
}

impl Header {
    /// Create a new header
    pub const fn new(format: FormatType, track_count: u16, division: TicksPerQuarterNote) -> Self {
        Self {
            format,
            track_count,
            division,
        }
    }
    /// The file format
    pub const fn format_type(&self) -> FormatType {
        self.format
    }
    /// The number of track chunks declared
    pub const fn track_count(&self) -> u16 {
        self.track_count
    }
    /// Get the timing props
    pub const fn division(&self) -> TicksPerQuarterNote {
        self.division
    }
}
