use crate::models::ApplicationStatus;

/// Display language. Persisted alongside the session id and passed into the
/// stores explicitly; there is no process-global language state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    En,
    Vi,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Vi => "vi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "en" => Some(Language::En),
            "vi" => Some(Language::Vi),
            _ => None,
        }
    }
}

/// Looks up a UI string. Unknown keys fall back to the key itself.
pub fn tr(lang: Language, key: &str) -> &str {
    let found = match lang {
        Language::En => lookup_en(key),
        Language::Vi => lookup_vi(key),
    };
    found.unwrap_or(key)
}

/// Translated label for a pipeline stage.
pub fn status_label(lang: Language, status: ApplicationStatus) -> &'static str {
    match lang {
        Language::En => status.as_str(),
        Language::Vi => match status {
            ApplicationStatus::New => "Mới",
            ApplicationStatus::Wishlist => "Quan tâm",
            ApplicationStatus::Applied => "Đã nộp CV",
            ApplicationStatus::Interviewing => "Đang phỏng vấn",
            ApplicationStatus::OfferReceived => "Đã nhận Offer",
            ApplicationStatus::Rejected => "Bị từ chối",
        },
    }
}

fn lookup_en(key: &str) -> Option<&'static str> {
    Some(match key {
        "dashboard.analyses" => "Total Analyses",
        "dashboard.total" => "Applications",
        "dashboard.interviewing" => "Interviewing",
        "dashboard.offers" => "Offers",
        "dashboard.added" => "Added",
        "dashboard.applications" => "Saved Applications",
        "dashboard.saved_jds" => "Saved JDs",
        "dashboard.perfect_matches" => "High Match (>90%)",
        "dashboard.activity" => "Activity Log",
        "dashboard.no_apps" => "No applications found. Start by analyzing a new job!",

        "notif.title" => "Notifications",
        "notif.empty" => "No notifications yet.",
        "notif.analysis_success_title" => "Analysis Complete",
        "notif.analysis_failed_title" => "Analysis Failed",
        "notif.app_saved_title" => "Application Saved",
        "notif.app_saved_msg" => "Successfully added to your pipeline.",
        "notif.generic_error" => "An error occurred.",

        "library.no_jds" => "No JDs found. Add one to get started!",

        "result.overall_score" => "Overall Match Score",
        "result.must_have" => "Must Have",
        "result.nice_to_have" => "Nice to Have",
        "result.radar_chart" => "Competency Radar",
        "result.matched_keywords" => "Matched Keywords",
        "result.ai_assessment" => "AI Executive Summary",
        "result.detailed_comparison" => "Detailed Comparison",
        "result.strengths" => "Key Strengths",
        "result.weaknesses" => "Missing Skills / Gaps",
        "result.interview_questions" => "Interview Prep Questions",
        "result.no_assessment" => "No assessment provided.",
        "result.none" => "No analysis attached to this application.",
        "result.jd" => "Job Description",
        _ => return None,
    })
}

fn lookup_vi(key: &str) -> Option<&'static str> {
    Some(match key {
        "dashboard.analyses" => "Lượt phân tích",
        "dashboard.total" => "Hồ sơ",
        "dashboard.interviewing" => "Đang phỏng vấn",
        "dashboard.offers" => "Offer",
        "dashboard.added" => "Ngày tạo",
        "dashboard.applications" => "Hồ sơ đã lưu",
        "dashboard.saved_jds" => "JD trong kho",
        "dashboard.perfect_matches" => "Độ khớp cao (>90%)",
        "dashboard.activity" => "Hoạt động gần đây",
        "dashboard.no_apps" => "Chưa có dữ liệu. Hãy thử phân tích công việc đầu tiên!",

        "notif.title" => "Thông báo",
        "notif.empty" => "Chưa có thông báo nào.",
        "notif.analysis_success_title" => "Phân tích hoàn tất",
        "notif.analysis_failed_title" => "Phân tích thất bại",
        "notif.app_saved_title" => "Đã lưu hồ sơ",
        "notif.app_saved_msg" => "Hồ sơ đã được thêm vào danh sách theo dõi.",
        "notif.generic_error" => "Đã có lỗi xảy ra.",

        "library.no_jds" => "Danh sách trống. Hãy thêm JD đầu tiên!",

        "result.overall_score" => "Điểm phù hợp",
        "result.must_have" => "Yêu cầu Bắt buộc",
        "result.nice_to_have" => "Điểm cộng (Ưu tiên)",
        "result.radar_chart" => "Biểu đồ năng lực",
        "result.matched_keywords" => "Từ khóa khớp",
        "result.ai_assessment" => "Nhận xét tổng quan từ AI",
        "result.detailed_comparison" => "So sánh chi tiết từng mục",
        "result.strengths" => "Điểm mạnh nổi bật",
        "result.weaknesses" => "Điểm yếu & Kỹ năng thiếu",
        "result.interview_questions" => "Gợi ý câu hỏi phỏng vấn",
        "result.no_assessment" => "Chưa có nhận xét.",
        "result.none" => "Hồ sơ này chưa có kết quả phân tích.",
        "result.jd" => "Mô tả công việc",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_key_both_languages() {
        assert_eq!(tr(Language::En, "notif.analysis_success_title"), "Analysis Complete");
        assert_eq!(tr(Language::Vi, "notif.analysis_success_title"), "Phân tích hoàn tất");
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        assert_eq!(tr(Language::En, "nope.missing"), "nope.missing");
        assert_eq!(tr(Language::Vi, "nope.missing"), "nope.missing");
    }

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("EN"), Some(Language::En));
        assert_eq!(Language::parse("vi"), Some(Language::Vi));
        assert_eq!(Language::parse("fr"), None);
    }

    #[test]
    fn test_status_labels_cover_all_stages() {
        for status in ApplicationStatus::ALL {
            assert!(!status_label(Language::Vi, status).is_empty());
            assert_eq!(status_label(Language::En, status), status.as_str());
        }
    }
}
