mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::ClientRequest;
pub use request::ClientRequestBuilder;
pub use request::OnUpgrade;
pub use request::UpgradeFuture;

mod response;
pub use response::Response;
pub use response::ResponseHead;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
pub use error::UpgradeError;
