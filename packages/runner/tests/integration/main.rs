mod support;
mod compiled;
mod interpreted;
