mod consumer;
mod feed;
mod relay;

pub(crate) use consumer::Consumer;
pub(crate) use feed::Feed;
pub(crate) use relay::Relay;
