mod lifecycle;
mod submit;
