pub mod skill_profile;

pub use skill_profile::{
    CommunicationChannel, FeedbackStyle, LongTermGoal, MeetingFrequency, MentorMotivation,
    MentorshipGoal, Readiness, ShortTermGoal, SkillProfile, SkillRating, SoftSkill,
    SuccessMetric, TechnicalSkill,
};
