pub mod llm;
pub mod objects;
pub mod storage;
pub mod system;
