/// Month names and separators used when rendering display strings.
///
/// Passed explicitly into every formatting call; host locale settings are never consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFormat {
    pub month_names: [&'static str; 12],
    pub group_separator: char,
    pub decimal_separator: char,
}

impl LocaleFormat {
    /// Bahasa Indonesia: `1.000.000`, `23,45`, `07 Maret 2024`.
    pub const fn indonesian() -> Self {
        Self {
            month_names: [
                "Januari",
                "Februari",
                "Maret",
                "April",
                "Mei",
                "Juni",
                "Juli",
                "Agustus",
                "September",
                "Oktober",
                "November",
                "Desember",
            ],
            group_separator: '.',
            decimal_separator: ',',
        }
    }

    /// Name for a 1-based month number.
    pub fn month_name(&self, month: u32) -> Option<&'static str> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.month_names.get(index).copied()
    }
}

impl Default for LocaleFormat {
    fn default() -> Self {
        Self::indonesian()
    }
}
