use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::auth::jwt::AuthenticatedUser;
use crate::db::ScoreRepository;
use crate::errors::AppError;
use crate::game::duplicate::DUPLICATE_WINDOW;
use crate::models::common::ApiResponse;
use crate::models::score::{ScoreQueryParams, SubmitScoreRequest};
use crate::services::score_service;

#[tracing::instrument(
    name = "Submit score",
    skip(body, repo, user),
    fields(
        user_id = %user.user_id,
        username = %user.username,
        player_name = ?body.player_name
    )
)]
pub async fn submit_score<S: ScoreRepository>(
    user: AuthenticatedUser,
    body: web::Json<SubmitScoreRequest>,
    repo: web::Data<S>,
) -> Result<HttpResponse, AppError> {
    let record = score_service::submit_score(
        repo.get_ref(),
        &DUPLICATE_WINDOW,
        &body,
        Some(user.user_id),
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success("Score saved successfully", record)))
}

#[tracing::instrument(name = "List leaderboard", skip(query, repo))]
pub async fn list_scores<S: ScoreRepository>(
    query: web::Query<ScoreQueryParams>,
    repo: web::Data<S>,
) -> Result<HttpResponse, AppError> {
    let leaderboard_query = score_service::parse_leaderboard_query(&query)?;
    let page = score_service::leaderboard(repo.get_ref(), &leaderboard_query).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[tracing::instrument(
    name = "List own scores",
    skip(query, repo, user),
    fields(user_id = %user.user_id, username = %user.username)
)]
pub async fn list_my_scores<S: ScoreRepository>(
    user: AuthenticatedUser,
    query: web::Query<ScoreQueryParams>,
    repo: web::Data<S>,
) -> Result<HttpResponse, AppError> {
    let mut leaderboard_query = score_service::parse_leaderboard_query(&query)?;
    leaderboard_query.filter.user_id = Some(user.user_id);
    let page = score_service::leaderboard(repo.get_ref(), &leaderboard_query).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[tracing::instrument(name = "Game stats", skip(repo))]
pub async fn get_stats<S: ScoreRepository>(repo: web::Data<S>) -> Result<HttpResponse, AppError> {
    let stats = score_service::game_stats(repo.get_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Statistics retrieved", stats)))
}
