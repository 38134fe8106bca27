//! Minimal MessagePack codec (§4.4) plus the delta/RLE integer vector
//! encoding built on top of it (§4.5).

mod delta;
mod primitive;

pub use delta::{
    apply_delta_passes, decode_delta_rle, decode_rle, delta_vec, encode_delta_rle, encode_rle,
    reencode_rle_array, undelta_vec, undo_delta_passes,
};
pub use primitive::{
    is_arr, is_fixmap, read_array_header, read_bin, read_bool, read_int, read_map_header,
    read_number, read_string, write_array_header, write_bin, write_bool, write_int,
    write_map_header, write_nil, write_number, write_string, write_uint,
};
