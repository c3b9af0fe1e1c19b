pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("a node with id \"{id}\" already exists")]
    DuplicateNodeId { id: String },
}
