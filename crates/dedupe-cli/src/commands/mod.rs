pub mod dedupe;
