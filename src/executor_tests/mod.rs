mod dataloader;
mod directives;
mod executor;
mod interfaces_unions;
mod variables;
