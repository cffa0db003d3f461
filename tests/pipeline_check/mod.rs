mod mem_pipeline_case;
mod sled_pipeline_case;
