use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortListError {
    #[error("failed to read ports file `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
