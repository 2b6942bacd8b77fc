pub mod image_overlay_sink;
