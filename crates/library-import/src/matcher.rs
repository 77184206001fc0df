//! Exact-then-fuzzy column matching.

/// A parsed CSV row with its (trimmed) headers.
pub struct Row<'a> {
    headers: &'a [String],
    values: &'a csv::StringRecord,
}

impl<'a> Row<'a> {
    pub fn new(headers: &'a [String], values: &'a csv::StringRecord) -> Self {
        Self { headers, values }
    }

    /// Non-blank value under the header at `idx`.
    fn value_at(&self, idx: usize) -> Option<String> {
        self.values
            .get(idx)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn position(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.headers.iter().position(|h| pred(h.as_str()))
    }

    /// True if every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.trim().is_empty())
    }
}

/// The student fields an import row can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentField {
    Timestamp,
    Email,
    Name,
    Mobile,
    ParentName,
    ParentMobile,
    Address,
    VehicleNumber,
    Photo,
}

impl StudentField {
    /// Header names tried for this field, most specific first.
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            Self::Timestamp => &["Timestamp", "timestamp", "Time", "time", "Date", "date"],
            Self::Email => &["Email Address", "email", "Email", "E-mail", "e-mail"],
            Self::Name => &["Name", "name", "student name", "Student Name"],
            Self::Mobile => &[
                "Mobile Number",
                "mobile number",
                "mobile",
                "Mobile",
                "phone",
                "Phone",
            ],
            Self::ParentName => &[
                "Parent's Name",
                "Parents name",
                "parents name",
                "Parents Name",
                "parent name",
                "Parent Name",
                "Guardian Name",
            ],
            Self::ParentMobile => &[
                "Parent's Mobile Number",
                "Parent's number",
                "parent's number",
                "Parent's mobile number",
                "parent mobile",
                "Parent Mobile",
                "guardian mobile",
            ],
            Self::Address => &[
                "Address",
                "address",
                "home address",
                "Home Address",
                "student address",
                "Student Address",
            ],
            Self::VehicleNumber => &[
                "Vehicle Number",
                "Vehicle number",
                "vehicle number",
                "vehicle no",
                "Vehicle No",
                "bike number",
                "car number",
            ],
            Self::Photo => &[
                "Student Photo",
                "student photo",
                "Student photo",
                "photo",
                "Photo",
                "image",
                "student image",
            ],
        }
    }
}

/// Substring pairs the fuzzy pass must never match: (candidate, header fragment).
const FUZZY_EXCLUSIONS: &[(&str, &str)] = &[("address", "email")];

/// Shortest candidate allowed to match as a substring.
const MIN_FUZZY_LEN: usize = 4;

/// Locates one field in a row.
///
/// Pass 1 tries each candidate as an exact header, then case-insensitively.
/// Pass 2 accepts a header containing the candidate, for candidates of at
/// least four characters, minus [`FUZZY_EXCLUSIONS`]. A header that matches
/// but holds a blank value does not count.
#[derive(Debug, Clone, Copy)]
pub struct FieldMatcher {
    candidates: &'static [&'static str],
}

impl FieldMatcher {
    pub fn new(candidates: &'static [&'static str]) -> Self {
        Self { candidates }
    }

    pub fn for_field(field: StudentField) -> Self {
        Self::new(field.candidates())
    }

    pub fn find(&self, row: &Row<'_>) -> Option<String> {
        self.exact(row).or_else(|| self.fuzzy(row))
    }

    fn exact(&self, row: &Row<'_>) -> Option<String> {
        self.candidates.iter().find_map(|candidate| {
            row.position(|h| h == *candidate)
                .and_then(|idx| row.value_at(idx))
                .or_else(|| {
                    row.position(|h| h.eq_ignore_ascii_case(candidate))
                        .and_then(|idx| row.value_at(idx))
                })
        })
    }

    fn fuzzy(&self, row: &Row<'_>) -> Option<String> {
        self.candidates.iter().find_map(|candidate| {
            let needle = candidate.to_lowercase();
            if needle.chars().count() < MIN_FUZZY_LEN {
                return None;
            }
            row.position(|h| {
                let header = h.to_lowercase();
                let excluded = FUZZY_EXCLUSIONS
                    .iter()
                    .any(|(c, fragment)| needle == *c && header.contains(fragment));
                !excluded && header.contains(&needle)
            })
            .and_then(|idx| row.value_at(idx))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(headers: &[&str], values: &[&str], field: StudentField) -> Option<String> {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let record = csv::StringRecord::from(values.to_vec());
        FieldMatcher::for_field(field).find(&Row::new(&headers, &record))
    }

    #[test]
    fn exact_header_wins() {
        assert_eq!(
            find(&["Name", "Mobile Number"], &[" Asha ", "9000000001"], StudentField::Name).as_deref(),
            Some("Asha")
        );
    }

    #[test]
    fn case_insensitive_header() {
        assert_eq!(
            find(&["MOBILE NUMBER"], &["9000000001"], StudentField::Mobile).as_deref(),
            Some("9000000001")
        );
    }

    #[test]
    fn exact_beats_earlier_fuzzy_column() {
        // "Parent Name" contains "name", but the exact "Name" column is preferred.
        assert_eq!(
            find(&["Parent Name", "Name"], &["Ravi", "Asha"], StudentField::Name).as_deref(),
            Some("Asha")
        );
    }

    #[test]
    fn fuzzy_finds_decorated_header() {
        assert_eq!(
            find(
                &["Your Mobile Number (WhatsApp)"],
                &["9000000001"],
                StudentField::Mobile
            )
            .as_deref(),
            Some("9000000001")
        );
    }

    #[test]
    fn address_never_matches_email_column() {
        assert_eq!(
            find(
                &["Email Address"],
                &["asha@example.com"],
                StudentField::Address
            ),
            None
        );
        assert_eq!(
            find(
                &["Email Address", "Permanent Address"],
                &["asha@example.com", "12 Main Road"],
                StudentField::Address
            )
            .as_deref(),
            Some("12 Main Road")
        );
    }

    #[test]
    fn blank_values_do_not_count() {
        assert_eq!(find(&["Name"], &["   "], StudentField::Name), None);
        assert_eq!(
            find(&["Name", "Student Name"], &["", "Asha"], StudentField::Name).as_deref(),
            Some("Asha")
        );
    }

    #[test]
    fn fuzzy_takes_first_matching_header() {
        assert_eq!(
            find(
                &["Date of joining", "Notes"],
                &["1/15/2025", "x"],
                StudentField::Timestamp
            )
            .as_deref(),
            Some("1/15/2025")
        );
    }
}
