//! Academic year derivation from Edumate enrolment fields

/// Derive the academic year shown to families
///
/// A non-empty `short_form_run` wins. Otherwise `current_form_run` is read:
/// anything mentioning `Kindergarten` is `K`, `Year 7` style values yield the
/// text after the first `Year`, and everything else is `Prep`. A form run
/// that is just `Year` has no year.
pub fn academic_year(short_form_run: Option<&str>, current_form_run: Option<&str>) -> Option<String> {
    if let Some(short) = short_form_run.filter(|s| !s.is_empty()) {
        return Some(short.to_string());
    }

    let form_run = current_form_run.unwrap_or_default();
    if form_run.contains("Kindergarten") {
        return Some("K".to_string());
    }
    if form_run.contains("Year") {
        let year = form_run.split("Year").nth(1).unwrap_or_default().trim();
        return (!year.is_empty()).then(|| year.to_string());
    }
    Some("Prep".to_string())
}

/// Whether an Edumate `student_status` marks a current student
pub fn is_current_enrolment(student_status: Option<&str>) -> bool {
    student_status == Some("Current Enrolment")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Some("7"), Some("Year 8") => Some("7".to_string()); "short form wins")]
    #[test_case(Some(""), Some("Kindergarten 2024") => Some("K".to_string()); "kindergarten")]
    #[test_case(None, Some("Year 7") => Some("7".to_string()); "year suffix")]
    #[test_case(None, Some("2024 Year  11 ") => Some("11".to_string()); "suffix is trimmed")]
    #[test_case(None, Some("Year") => None; "bare year has no suffix")]
    #[test_case(None, Some("Pre-Kinder") => Some("Prep".to_string()); "anything else is prep")]
    #[test_case(None, None => Some("Prep".to_string()); "missing form run")]
    fn test_academic_year(short: Option<&str>, current: Option<&str>) -> Option<String> {
        academic_year(short, current)
    }

    #[test]
    fn test_current_enrolment() {
        assert!(is_current_enrolment(Some("Current Enrolment")));
        assert!(!is_current_enrolment(Some("Past Enrolment")));
        assert!(!is_current_enrolment(None));
    }
}
