use std::fmt;

/// A recoverable anomaly encountered while decoding. The parser never
/// aborts on these; it records one and keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    MagicVariant,
    SpriteAbsent,
    ResourceTruncated,
    ColorMissing,
    DanglingRegisterId,
    RegisterShortfall,
    DuplicateId,
    SecondRoot,
    TrailingBytes,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WarningKind::MagicVariant => "MagicVariant",
            WarningKind::SpriteAbsent => "SpriteAbsent",
            WarningKind::ResourceTruncated => "ResourceTruncated",
            WarningKind::ColorMissing => "ColorMissing",
            WarningKind::DanglingRegisterId => "DanglingRegisterId",
            WarningKind::RegisterShortfall => "RegisterShortfall",
            WarningKind::DuplicateId => "DuplicateId",
            WarningKind::SecondRoot => "SecondRoot",
            WarningKind::TrailingBytes => "TrailingBytes",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub offset: usize,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, offset: usize, message: impl Into<String>) -> Self {
        Warning {
            kind,
            offset,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] @0x{:X}: {}", self.kind, self.offset, self.message)
    }
}
