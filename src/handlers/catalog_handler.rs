use actix_web::HttpResponse;

use crate::models::common::ApiResponse;
use crate::models::score::{Category, CategoryInfo, Difficulty, DifficultyInfo};

pub const CATEGORIES: [CategoryInfo; 4] = [
    category_info(Category::Heroes),
    category_info(Category::Movies),
    category_info(Category::Musicians),
    category_info(Category::Videogames),
];

pub const DIFFICULTIES: [DifficultyInfo; 3] = [
    difficulty_info(Difficulty::Easy),
    difficulty_info(Difficulty::Medium),
    difficulty_info(Difficulty::Hard),
];

const fn category_info(id: Category) -> CategoryInfo {
    CategoryInfo { id, name: id.display_name() }
}

const fn difficulty_info(id: Difficulty) -> DifficultyInfo {
    DifficultyInfo { id, name: id.display_name(), pairs: id.pairs() }
}

pub async fn list_categories() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(("Cache-Control", "public, max-age=3600"))
        .json(ApiResponse::success("Categories retrieved", CATEGORIES))
}

pub async fn list_difficulties() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(("Cache-Control", "public, max-age=3600"))
        .json(ApiResponse::success("Difficulties retrieved", DIFFICULTIES))
}
