mod support;
mod pipeline;
