//! Canonical column names of the candidate/job-event export.
//!
//! Column names are matched verbatim against the source table; the `.1`
//! suffix marks the job-posting side of a duplicated header, as produced by
//! the original export.

pub const ID: &str = "ID";
pub const CANDIDATE_STATE: &str = "Candidate State";
pub const EVENT_TYPE: &str = "event_type__val";
pub const EVENT_FEEDBACK: &str = "event_feedback";
pub const SECTOR: &str = "Sector";
pub const LAST_ROLE: &str = "Last Role";
pub const TAG: &str = "TAG";

// Education: candidate attained level/area vs. job requirement.
pub const STUDY_TITLE: &str = "Study Title";
pub const STUDY_AREA: &str = "Study area";
pub const STUDY_LEVEL: &str = "Study Level";
pub const STUDY_AREA_JOB: &str = "Study Area.1";

// Experience, candidate vs. job requirement.
pub const YEARS_EXPERIENCE: &str = "Years Experience";
pub const YEARS_EXPERIENCE_JOB: &str = "Years Experience.1";

// Salary (RAL = annual gross) columns.
pub const EXPECTED_RAL: &str = "Expected Ral";
pub const CURRENT_RAL: &str = "Current Ral";
pub const MINIMUM_RAL: &str = "Minimum Ral";
pub const MAXIMUM_RAL: &str = "Ral Maximum";

// Job-posting description fields used by the profile text builder.
pub const JOB_TITLE: &str = "Job Title Hiring";
pub const JOB_FAMILY: &str = "Job Family Hiring";
pub const RECRUITMENT_REQUEST: &str = "Recruitment Request";
pub const JOB_DESCRIPTION: &str = "Job Description";
pub const CANDIDATE_PROFILE: &str = "Candidate Profile";

// Candidate residence, most to least specific.
pub const RESIDENCE_CITY: &str = "Residence Italian City";
pub const RESIDENCE_PROVINCE: &str = "Residence Italian Province";
pub const RESIDENCE_REGION: &str = "Residence Italian Region";
pub const RESIDENCE_COUNTRY: &str = "Residence Country";

// Raw performance rating (0..=5) and its 0..=1 rescaling.
pub const OVERALL: &str = "Overall";
pub const OVERALL_SCALED: &str = "Overall_scaled";

// Derived feature columns appended by the feature builder.
pub const STUDY_TITLE_SCORE: &str = "study_title_score";
pub const EXPERIENCE_MATCH_SCORE: &str = "experience_match_score";
pub const SALARY_FIT_SCORE: &str = "salary_fit_score";
pub const CURRENT_SALARY_FIT_SCORE: &str = "current_salary_fit_score";
pub const STUDY_AREA_SCORE: &str = "study_area_score";
pub const PROFESSIONAL_SIMILARITY_SCORE: &str = "professional_similarity_score";
pub const PROFILE_SIMILARITY_SCORE: &str = "profile_similarity_score";
pub const DISTANCE_KM: &str = "distance_km";
pub const PROXIMITY_SCORE: &str = "proximity_score";
pub const OVERALL_MATCH_SCORE: &str = "overall_match_score";
