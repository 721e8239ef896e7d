pub mod frame_annotator;
