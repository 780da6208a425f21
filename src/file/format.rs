use num_enum::{IntoPrimitive, TryFromPrimitive};

#[doc = r#"
The format word of a MIDI file header.

```text
0  SingleMultiChannel       one track holding every channel
1  Simultaneous             several tracks played together
2  SequentiallyIndependent  several independent single-track patterns
```
"#]
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive, IntoPrimitive,
)]
#[repr(u16)]
pub enum FormatType {
    /// Format 0
    SingleMultiChannel = 0,
    /// Format 1
    Simultaneous = 1,
    /// Format 2
    SequentiallyIndependent = 2,
}

impl FormatType {
    /// The format word as stored in the header chunk
    pub fn word(self) -> u16 {
        self.into()
    }

    /// Parse the stored format word
    pub fn from_word(word: u16) -> Option<Self> {
        Self::try_from(word).ok()
    }
}

#[test]
fn format_words() {
    assert_eq!(FormatType::from_word(1), Some(FormatType::Simultaneous));
    assert_eq!(FormatType::from_word(3), None);
    assert_eq!(FormatType::SequentiallyIndependent.word(), 2);
}
