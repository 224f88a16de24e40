pub mod delivery_attempt_repo;
pub mod goal_repo;
pub mod nudge_repo;
pub mod owner_repo;

pub use delivery_attempt_repo::DeliveryAttemptRepo;
pub use goal_repo::GoalRepo;
pub use nudge_repo::NudgeRepo;
pub use owner_repo::OwnerRepo;
