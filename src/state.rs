use crate::repository::Repository;

#[derive(Debug, Clone)]
#[must_use]
pub struct SharedState {
    pub repository: Repository,
}
