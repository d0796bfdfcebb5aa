//! 请求层：传输抽象、重试客户端、测试用脚本化传输

pub mod mock;
pub mod request;
pub mod transport;

pub use mock::ScriptedTransport;
pub use request::{RequestClient, RetryPolicy, RetryReport};
pub use transport::{OutboundRequest, ReqwestTransport, Transport, TransportResponse};
