pub mod ffmpeg_file_sink;
pub mod letterbox;
pub mod ready_ticker;
