mod file_dto;

pub use file_dto::{
    ConvertResponseDto, DeleteFileResponseDto, FileResponseDto, ParseResponseDto, UploadFileDto,
};
