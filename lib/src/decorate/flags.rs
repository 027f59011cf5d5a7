use serde::Serialize;

use crate::lo::{Calendar, Enrollment, Properties};

/// Course-wide switches derived from its properties and optional files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFlags {
    pub is_portfolio: bool,
    pub is_private: bool,
    pub are_videos_hidden: bool,
    pub are_lab_steps_auto_numbered: bool,
    pub auth_level: u8,
    pub has_enrollment: bool,
    pub has_calendar: bool,
    pub has_white_list: bool,
}

impl CourseFlags {
    pub fn derive(
        properties: &Properties,
        calendar: Option<&Calendar>,
        enrollment: Option<&Enrollment>,
    ) -> Self {
        CourseFlags {
            is_portfolio: properties.portfolio,
            is_private: properties.private,
            are_videos_hidden: properties.hide_videos,
            are_lab_steps_auto_numbered: properties.lab_steps_auto_number,
            auth_level: properties.auth,
            has_enrollment: enrollment.is_some(),
            has_calendar: calendar.is_some(),
            has_white_list: enrollment.map_or(false, |e| !e.allowlist.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all_off() {
        let flags = CourseFlags::derive(&Properties::default(), None, None);
        assert_eq!(flags, CourseFlags::default());
        assert_eq!(flags.auth_level, 0);
    }

    #[test]
    fn flags_follow_properties_and_files() {
        let properties = Properties::parse("private: true\nauth: 2\nlabStepsAutoNumber: yes\n").unwrap();
        let enrollment = Enrollment { students: vec![], allowlist: vec!["alice".into()] };
        let flags = CourseFlags::derive(&properties, Some(&Calendar::default()), Some(&enrollment));

        assert!(flags.is_private && flags.are_lab_steps_auto_numbered);
        assert!(!flags.is_portfolio && !flags.are_videos_hidden);
        assert_eq!(flags.auth_level, 2);
        assert!(flags.has_calendar && flags.has_enrollment && flags.has_white_list);
    }
}
