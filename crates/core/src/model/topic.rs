/// Popularity counter for a quiz topic.
///
/// Created at 1 on the first game for a topic and incremented on every later
/// one; never decremented or deleted. Only used for trending-topic reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicCount {
    pub topic: String,
    pub count: u64,
}

impl TopicCount {
    #[must_use]
    pub fn new(topic: impl Into<String>, count: u64) -> Self {
        Self {
            topic: topic.into(),
            count,
        }
    }
}
