mod loading;
mod relations;
mod rendering;
