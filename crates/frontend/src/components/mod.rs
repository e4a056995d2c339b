pub mod map_view;
