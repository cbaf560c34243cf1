/// Target bucket of every storage operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketDescriptor {
    pub name: String,
    pub region: String,
}

impl BucketDescriptor {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
        }
    }
}

/// Outcome of a successful bucket creation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketStatus {
    Created,
    /// The bucket already exists and belongs to the caller
    AlreadyOwned,
}

#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub public_read: bool,
    pub content_type: Option<String>,
}

/// One page of a bucket listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    /// Token for the next page, `None` on the last one
    pub next_token: Option<String>,
}

impl ObjectPage {
    pub fn is_last(&self) -> bool {
        self.next_token.is_none()
    }
}
