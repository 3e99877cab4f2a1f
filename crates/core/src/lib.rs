pub mod shared {
    pub mod affine_transform;
    pub mod bounds;
    pub mod constants;
    pub mod frame;
    pub mod model_resolver;
    pub mod settings;
    pub mod video_metadata;
    pub mod warp;
}

pub mod alignment {
    pub mod domain {
        pub mod aligned_face;
        pub mod canonical_landmarks;
        pub mod umeyama;
    }
}

pub mod detection {
    pub mod domain {
        pub mod detection;
        pub mod face_tracker;
        pub mod heatmap_decoder;
    }
}

pub mod inference {
    pub mod domain {
        pub mod face_models;
    }
    pub mod infrastructure;
}

pub mod compositing {
    pub mod domain {
        pub mod composite_job;
        pub mod face_compositor;
    }
    pub mod infrastructure;
}

pub mod output {
    pub mod domain {
        pub mod frame_sink;
        pub mod pipeline_stats;
    }
    pub mod infrastructure;
    pub mod paced_writer;
}

pub mod pipeline {
    pub mod frame_pipeline;
    pub mod frame_processor;
    pub mod stages;
    pub mod infrastructure {
        pub mod threaded_frame_pipeline;
    }
    #[cfg(test)]
    pub(crate) mod test_support;
}

pub mod video {
    pub mod domain {
        pub mod video_reader;
    }
    pub mod infrastructure {
        pub mod ffmpeg_reader;
    }
    pub mod frame_pump;
}
