pub mod file_path;
