pub mod chapters;
pub mod interactive;
pub mod split;
pub mod toc;
